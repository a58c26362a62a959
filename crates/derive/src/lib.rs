//! # ormeta derive
//!
//! `#[derive(Model)]` turns a struct declaration into the `ModelSchema`
//! the metadata engine reads:
//!
//! ```rust,ignore
//! #[derive(Model)]
//! #[model(table = "members")]
//! pub struct User {
//!     #[model(flatten)]
//!     pub base: BaseModel,
//!     #[sql("not null;unique")]
//!     pub email: String,
//!     #[orm("foreignkey:UserID")]
//!     pub addresses: Vec<Address>,
//! }
//! ```
//!
//! Only public fields take part. `#[sql(..)]` and `#[orm(..)]` carry the
//! tag annotations of their channel; `#[model(flatten)]` promotes the
//! columns of another model into this one.

use proc_macro::TokenStream;

mod model;

#[proc_macro_derive(Model, attributes(model, sql, orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input.into()).into()
}
