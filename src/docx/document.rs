use std::path::Path;

use super::package::DocxPackage;
use super::xml::{XmlDocument, XmlElement};
use super::DocxError;

pub const DOCUMENT_PART: &str = "word/document.xml";

/// A Word document opened for editing: the package plus its parsed main part.
#[derive(Debug, Clone)]
pub struct Document {
    package: DocxPackage,
    main: XmlDocument,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        Self::from_package(DocxPackage::open(path)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        Self::from_package(DocxPackage::from_bytes(bytes)?)
    }

    pub fn from_package(package: DocxPackage) -> Result<Self, DocxError> {
        let main = package.xml_part(DOCUMENT_PART)?;
        if main.root.child("body").is_none() {
            return Err(DocxError::Xml {
                part: DOCUMENT_PART.to_string(),
                message: "missing w:body".to_string(),
            });
        }
        Ok(Self { package, main })
    }

    fn bodies(&self) -> impl Iterator<Item = &XmlElement> {
        self.main.root.children_named("body")
    }

    /// Top-level tables of the body, in document order.
    pub fn tables(&self) -> Vec<&XmlElement> {
        self.bodies()
            .flat_map(|body| body.children_named("tbl"))
            .collect()
    }

    pub fn tables_mut(&mut self) -> Vec<&mut XmlElement> {
        self.main
            .root
            .children_named_mut("body")
            .flat_map(|body| body.children_named_mut("tbl"))
            .collect()
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        self.tables_mut().into_iter().nth(index)
    }

    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    pub fn package_mut(&mut self) -> &mut DocxPackage {
        &mut self.package
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut package = self.package.clone();
        package.set_xml_part(DOCUMENT_PART, &self.main)?;
        package.to_bytes()
    }

    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
