//! Boundary to the native record parser.

/// Kind of scheduler file a raw record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Event,
    Stream,
    Account,
    Status,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Stream => "stream",
            Self::Account => "account",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns one raw scheduler record into JSON text.
///
/// Implementations never fail: unparsable input should produce empty or
/// invalid output, which the pipeline treats as "no data".
pub trait RecordParser: Send + Sync {
    fn parse(&self, raw: &str, file_type: FileType) -> String;
}

impl<F> RecordParser for F
where
    F: Fn(&str, FileType) -> String + Send + Sync,
{
    fn parse(&self, raw: &str, file_type: FileType) -> String {
        self(raw, file_type)
    }
}

/// Parser for upstreams that already emit one JSON object per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl RecordParser for JsonParser {
    fn parse(&self, raw: &str, _file_type: FileType) -> String {
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_parser_trims() {
        assert_eq!(JsonParser.parse("  {\"a\":1}\n", FileType::Event), "{\"a\":1}");
    }

    #[test]
    fn closures_are_parsers() {
        let parser = |raw: &str, ft: FileType| format!("{{\"raw\":\"{raw}\",\"type\":\"{ft}\"}}");
        assert_eq!(
            parser.parse("x", FileType::Account),
            r#"{"raw":"x","type":"account"}"#
        );
    }
}
