//! 文件操作错误定义

use thiserror::Error;
use zschem_core::entity::ModelError;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Invalid transform '{0}': {1}")]
    InvalidTransform(String, String),

    #[error("Invalid path data '{0}': {1}")]
    InvalidPath(String, String),

    #[error("Missing required child in {context}: {what}")]
    MissingChild {
        context: &'static str,
        what: &'static str,
    },

    #[error("No schematic metadata block found")]
    MissingMetadata,

    #[error("Unknown port kind '{0}'")]
    UnknownPortKind(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
