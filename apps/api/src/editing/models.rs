use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text substitution proposed by an external suggestion source.
///
/// `section` is advisory only: lookup is always by `original` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeProposal {
    #[serde(default)]
    pub section: String,
    pub original: String,
    #[serde(alias = "tailored")]
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ChangeProposal {
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            section: String::new(),
            original: original.into(),
            replacement: replacement.into(),
            reason: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Accept,
    Reject,
}

/// Uniform result of a single document operation. A failed locate is a normal,
/// user-visible outcome, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<Uuid>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            change_id: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            change_id: None,
        }
    }

    pub fn with_change_id(mut self, id: Uuid) -> Self {
        self.change_id = Some(id);
        self
    }
}

/// Outcome of one proposal inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalResult {
    pub original: String,
    #[serde(flatten)]
    pub result: OperationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// True only when every proposal in the batch succeeded.
    pub success: bool,
    pub applied_count: usize,
    pub failed_count: usize,
    pub results: Vec<ProposalResult>,
}

impl BatchResult {
    /// Runs `apply` once per proposal, in order. One failure never stops the rest.
    pub fn collect<'a>(
        proposals: impl IntoIterator<Item = &'a ChangeProposal>,
        mut apply: impl FnMut(&ChangeProposal) -> OperationResult,
    ) -> Self {
        let results: Vec<ProposalResult> = proposals
            .into_iter()
            .map(|p| ProposalResult {
                original: p.original.clone(),
                result: apply(p),
            })
            .collect();
        let applied_count = results.iter().filter(|r| r.result.success).count();
        let failed_count = results.len() - applied_count;
        Self {
            success: failed_count == 0,
            applied_count,
            failed_count,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_accepts_tailored_alias() {
        let json = r#"{"section": "EXPERIENCE", "original": "a", "tailored": "b", "reason": "JD keyword"}"#;
        let p: ChangeProposal = serde_json::from_str(json).unwrap();
        assert_eq!(p.replacement, "b");
        assert_eq!(p.reason.as_deref(), Some("JD keyword"));
    }

    #[test]
    fn test_proposal_section_is_optional() {
        let p: ChangeProposal =
            serde_json::from_str(r#"{"original": "a", "replacement": "b"}"#).unwrap();
        assert!(p.section.is_empty());
    }

    #[test]
    fn test_batch_counts_each_proposal_independently() {
        let proposals = vec![
            ChangeProposal::new("a", "1"),
            ChangeProposal::new("missing", "2"),
            ChangeProposal::new("c", "3"),
        ];
        let batch = BatchResult::collect(&proposals, |p| {
            if p.original == "missing" {
                OperationResult::failed("not found")
            } else {
                OperationResult::ok("done")
            }
        });
        assert!(!batch.success);
        assert_eq!(batch.applied_count, 2);
        assert_eq!(batch.failed_count, 1);
        assert_eq!(batch.results[1].original, "missing");
        assert!(!batch.results[1].result.success);
    }

    #[test]
    fn test_result_serializes_flat() {
        let batch = BatchResult::collect(&[ChangeProposal::new("a", "b")], |_| {
            OperationResult::ok("done")
        });
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["results"][0]["success"], true);
        assert_eq!(json["results"][0]["original"], "a");
        assert!(json["results"][0].get("change_id").is_none());
    }
}
