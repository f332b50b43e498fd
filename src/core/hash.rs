use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Stable fingerprint for an assessed message. Whitespace and case are
/// normalized first so trivially reformatted resubmissions deduplicate to
/// the same history row.
pub fn assessment_fingerprint(raw_text: &str) -> String {
    let normalized = raw_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    format!("asmt_{}", sha256_hex(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_whitespace_and_case() {
        let a = assessment_fingerprint("Join  our\tInternship\ntoday");
        let b = assessment_fingerprint("join our internship today");
        assert_eq!(a, b);
    }

    #[test]
    fn different_messages_get_different_fingerprints() {
        let a = assessment_fingerprint("pay the fee now");
        let b = assessment_fingerprint("no fees at any stage");
        assert_ne!(a, b);
    }
}
