//! Core business logic - framework-agnostic operations over the record store.
//!
//! The per-entity modules hold plain async functions taking a connection. The
//! [`facade::Facade`] wraps them with the artificial latency every dashboard
//! call goes through.

/// Credential checks and session identities
pub mod auth;
/// Class configuration decoding and lookup
pub mod class;
/// The data access facade used by every view
pub mod facade;
/// Fee ledger, balances, and invoice numbering
pub mod fee;
/// Mark recording, class mark sheets, and report cards
pub mod mark;
/// Dashboard headline figures
pub mod stats;
/// Student records
pub mod student;

pub use facade::Facade;

/// Next identifier in a `PREFIX` + zero-padded number sequence.
///
/// Identifiers that do not carry the prefix or a numeric suffix count as zero,
/// so an empty or unparsable history starts the sequence at 1.
pub(crate) fn next_sequence_id<'a, I>(prefix: &str, width: usize, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let last = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:0width$}", last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_sequence_id_increments_max() {
        let ids = ["INV00001", "INV00007", "INV00003"];
        assert_eq!(next_sequence_id("INV", 5, ids), "INV00008");
    }

    #[test]
    fn test_next_sequence_id_empty_history() {
        assert_eq!(next_sequence_id("STD", 4, []), "STD0001");
    }

    #[test]
    fn test_next_sequence_id_ignores_foreign_ids() {
        let ids = ["LEGACY-9", "INVabc", "INV00002"];
        assert_eq!(next_sequence_id("INV", 5, ids), "INV00003");
    }

    #[test]
    fn test_next_sequence_id_grows_past_width() {
        assert_eq!(next_sequence_id("STD", 4, ["STD9999"]), "STD10000");
    }
}
