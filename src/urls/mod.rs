//! URL and query-string utilities used while driving the OpenID handshake.

pub mod escape;
pub mod query;
pub mod validate;

pub use escape::html_escape;
pub use query::{
    build_query_string, parse_query_string, remove_openid_vars, url_decode, Params, OPENID_PREFIX,
};
pub use validate::{get_base_url, get_queryless_url, is_valid_url, validate_url};
