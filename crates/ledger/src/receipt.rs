use nimbus_types::{Hash32, ProviderId, TaskId};
use serde::{Deserialize, Serialize};

/// A tamper-evident record of a completed task, append-only once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub job_id: TaskId,
    pub provider_id: ProviderId,
    pub model_hash: Hash32,
    pub input_hash: Hash32,
    pub output_hash: Hash32,
    pub compute_time_ms: u64,
    pub timestamp: u64,
    pub proof: Vec<u8>,
}

impl Receipt {
    /// Canonical byte serialization used both for the per-receipt reward
    /// formula's inputs and for Merkle leaf hashing. Field order is fixed.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.job_id.as_str().as_bytes());
        buf.extend_from_slice(self.provider_id.as_str().as_bytes());
        buf.extend_from_slice(self.model_hash.as_bytes());
        buf.extend_from_slice(self.input_hash.as_bytes());
        buf.extend_from_slice(self.output_hash.as_bytes());
        buf.extend_from_slice(&self.compute_time_ms.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.proof);
        buf
    }

    pub fn leaf_hash(&self) -> Hash32 {
        Hash32::digest(&self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> Receipt {
        Receipt {
            job_id: TaskId::new("job-1"),
            provider_id: ProviderId::new("p1"),
            model_hash: Hash32::digest(b"model"),
            input_hash: Hash32::digest(b"input"),
            output_hash: Hash32::digest(b"output"),
            compute_time_ms: 1200,
            timestamp: 1000,
            proof: vec![1, 2, 3],
        }
    }

    #[test]
    fn canonical_bytes_are_deterministic() {
        assert_eq!(receipt().canonical_bytes(), receipt().canonical_bytes());
    }

    #[test]
    fn leaf_hash_changes_with_content() {
        let mut other = receipt();
        other.compute_time_ms += 1;
        assert_ne!(receipt().leaf_hash(), other.leaf_hash());
    }
}
