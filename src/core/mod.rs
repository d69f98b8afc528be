pub mod access_list;
pub mod amount;
pub mod columns;
pub mod document;
pub mod error;
pub mod render;
pub mod routes;
pub mod url;

pub use access_list::AccessList;
pub use error::RequestError;
pub use render::{RenderMode, RenderOptions, Renderer};
pub use routes::DispatchTable;
