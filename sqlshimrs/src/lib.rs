pub mod ast;
pub mod capabilities;
pub mod config;
pub mod conversion;
pub mod dialect;
pub mod error;
pub mod modifiers;
pub mod paging;
#[cfg(feature = "python")]
pub mod python;
pub mod render;
pub mod translator;
pub mod types;

pub use ast::{
    Command, Criteria, Decimal, DerivedColumn, Expression, Literal, QueryExpression, Select, SetOperator,
    SetQuery, SortSpecification, TableReference, Value,
};
pub use capabilities::{Capabilities, PagingStrategy, PseudoColumn, Version};
pub use config::{DatasourceConfig, SqlshimConfig, TranslatorConfig};
pub use conversion::{ConversionMatrix, ConversionRule};
pub use dialect::{Dialect, DialectKind};
pub use error::{Result, SqlshimError};
pub use modifiers::{FunctionModifier, FunctionModifierRegistry};
pub use paging::PagingSynthesizer;
pub use render::BindValue;
pub use translator::{TranslatedCommand, Translator};
pub use types::DataType;
