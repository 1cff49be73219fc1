use crate::ast::Document;

pub trait DocReader {
    type ReadError;

    fn read(self, source: &str) -> Result<Document, Self::ReadError>;
}

pub trait DocWriter {
    type WriteError;

    fn write(self, doc: Document) -> Result<String, Self::WriteError>;
}
