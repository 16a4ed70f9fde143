//! Error kinds raised while answering a metrics query.
//!
//! Every kind carries the caller-visible message. How a kind reaches the
//! caller is decided by [`MetricsError::disposition`]: date resolution
//! failures reject the request outright, engine failures become an error
//! result, collaborator failures are internal.

use thiserror::Error;

/// How the transport layer must surface a [`MetricsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hard rejection before the engine runs.
    Rejection,
    /// Error result: message as key, NaN as value.
    Soft,
    /// Store or other collaborator failure.
    Internal,
}

#[derive(Debug, Error)]
pub enum MetricsError {
    // ---
    #[error("Missing start date, it has to be defined")]
    MissingStartDate,

    #[error("Start date cannot be in the future")]
    FutureStartDate,

    #[error("Start date cannot be after end date")]
    InvertedRange,

    #[error("Date range cannot exceed 1 month")]
    RangeTooLong,

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    /// `min`/`max` over a metric with no values in the window.
    #[error("No {metric} values to compute {statistic}")]
    EmptyReduction { metric: String, statistic: &'static str },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl MetricsError {
    // ---
    pub fn disposition(&self) -> Disposition {
        // ---
        match self {
            MetricsError::MissingStartDate => Disposition::Rejection,
            MetricsError::Store(_) => Disposition::Internal,
            MetricsError::FutureStartDate
            | MetricsError::InvertedRange
            | MetricsError::RangeTooLong
            | MetricsError::InvalidMetric(_)
            | MetricsError::EmptyReduction { .. } => Disposition::Soft,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_messages_match_caller_contract() {
        // ---
        assert_eq!(
            MetricsError::MissingStartDate.to_string(),
            "Missing start date, it has to be defined"
        );
        assert_eq!(
            MetricsError::FutureStartDate.to_string(),
            "Start date cannot be in the future"
        );
        assert_eq!(
            MetricsError::InvertedRange.to_string(),
            "Start date cannot be after end date"
        );
        assert_eq!(
            MetricsError::RangeTooLong.to_string(),
            "Date range cannot exceed 1 month"
        );
        assert_eq!(
            MetricsError::InvalidMetric("pressure".into()).to_string(),
            "Invalid metric: pressure"
        );
    }

    #[test]
    fn test_only_missing_start_date_is_a_rejection() {
        // ---
        assert_eq!(
            MetricsError::MissingStartDate.disposition(),
            Disposition::Rejection
        );

        let soft = [
            MetricsError::FutureStartDate,
            MetricsError::InvertedRange,
            MetricsError::RangeTooLong,
            MetricsError::InvalidMetric("pressure".into()),
            MetricsError::EmptyReduction {
                metric: "temperature".into(),
                statistic: "min",
            },
        ];
        for err in soft {
            assert_eq!(err.disposition(), Disposition::Soft, "{err}");
        }

        let store = MetricsError::from(anyhow::anyhow!("connection reset"));
        assert_eq!(store.disposition(), Disposition::Internal);
        assert_eq!(store.to_string(), "connection reset");
    }
}
