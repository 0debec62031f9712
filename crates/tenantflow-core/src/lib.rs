//! tenantflow core
//!
//! 顧客ごとのプロビジョニングユニットを記述するためのモデル、
//! 識別子の導出、KDLマニフェストのパースを提供します。

pub mod error;
pub mod identifiers;
pub mod loader;
pub mod model;
pub mod parser;

pub use error::{FlowError, Result};
pub use identifiers::{Identifiers, derive};
pub use loader::{load_manifest, load_manifest_from_path};
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
