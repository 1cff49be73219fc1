use crate::ast::Document;
use crate::traits::DocReader;

pub struct NativeReader;

impl DocReader for NativeReader {
    type ReadError = serde_json::Error;

    fn read(self, source: &str) -> Result<Document, Self::ReadError> {
        serde_json::from_str(source)
    }
}
