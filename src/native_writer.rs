use crate::ast::Document;
use crate::traits::DocWriter;

pub struct NativeWriter;

impl DocWriter for NativeWriter {
    type WriteError = serde_json::Error;

    fn write(self, doc: Document) -> Result<String, Self::WriteError> {
        serde_json::to_string(&doc)
    }
}
