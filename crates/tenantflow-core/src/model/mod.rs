//! モデル定義
//!
//! tenantflowで扱う入力（顧客記述子、マニフェスト）と、
//! 宣言されるリソース（GitLabプロジェクト、GCPリソース、CI変数）を定義します。

mod cloud;
mod customer;
mod manifest;
mod repository;
mod variable;

// Re-exports
pub use cloud::*;
pub use customer::*;
pub use manifest::*;
pub use repository::*;
pub use variable::*;
