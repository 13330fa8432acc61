//! Minimal FASTA reading and writing.

use std::path::Path;
use vlpim_common::{ProteinSequence, Result, VlpimError};

use super::{read_input, write_output};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First whitespace-separated token of the header.
    pub id: String,
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

pub fn parse_fasta(content: &str) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let id = header.split_whitespace().next().unwrap_or_default();
            records.push(FastaRecord::new(id, String::new()));
        } else {
            match records.last_mut() {
                Some(record) => record.sequence.push_str(line),
                None => {
                    return Err(VlpimError::InvalidSequence(
                        "FASTA data found before the first '>' header".to_string(),
                    ))
                }
            }
        }
    }
    if let Some(empty) = records.iter().find(|r| r.sequence.is_empty()) {
        return Err(VlpimError::InvalidSequence(format!(
            "FASTA record '{}' has no residues",
            empty.id
        )));
    }
    Ok(records)
}

pub fn to_fasta_string(records: &[FastaRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push('>');
        out.push_str(&record.id);
        out.push('\n');
        out.push_str(&record.sequence);
        out.push('\n');
    }
    out
}

pub async fn load_fasta(path: &Path) -> Result<Vec<FastaRecord>> {
    parse_fasta(&read_input(path).await?)
}

pub async fn write_fasta(path: &Path, records: &[FastaRecord]) -> Result<()> {
    write_output(path, to_fasta_string(records)).await
}

/// First record of a FASTA file as the parent sequence.
pub async fn load_parent(path: &Path) -> Result<(String, ProteinSequence)> {
    let records = load_fasta(path).await?;
    let first = records
        .into_iter()
        .next()
        .ok_or_else(|| VlpimError::InvalidSequence(format!("{} contains no sequences", path.display())))?;
    let sequence = ProteinSequence::new(&first.sequence)?;
    Ok((first.id, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_records() {
        let records = parse_fasta(">sp|P1 some protein\nMKTAY\nIAKQR\n\n>mutant_0001\nMKTAA\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], FastaRecord::new("sp|P1", "MKTAYIAKQR"));
        assert_eq!(records[1].id, "mutant_0001");
    }

    #[test]
    fn test_rejects_headerless_and_empty_records() {
        assert!(parse_fasta("MKTAY\n").is_err());
        assert!(parse_fasta(">a\n>b\nMK\n").is_err());
        assert!(parse_fasta("").unwrap().is_empty());
    }

    #[test]
    fn test_write_then_parse() {
        let records = vec![FastaRecord::new("mutant_0000", "MKTAY"), FastaRecord::new("mutant_0001", "MKTAW")];
        let text = to_fasta_string(&records);
        assert_eq!(text, ">mutant_0000\nMKTAY\n>mutant_0001\nMKTAW\n");
        assert_eq!(parse_fasta(&text).unwrap(), records);
    }

    #[tokio::test]
    async fn test_load_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vlp.fasta");
        std::fs::write(&path, ">vlp capsid\nmktayiakqr\n>other\nAAAA\n").unwrap();
        let (id, seq) = load_parent(&path).await.unwrap();
        assert_eq!(id, "vlp");
        assert_eq!(seq.as_str(), "MKTAYIAKQR");

        assert!(matches!(
            load_parent(&dir.path().join("missing.fasta")).await,
            Err(VlpimError::MissingInput(_))
        ));
    }
}
