//! Identifier naming scheme.
//!
//! Every identifier the generators emit is derived here from the bare
//! interface and method names, by plain concatenation. Header guards are the
//! only identifiers that change case.

/// `struct cc_client_<Interface>`
#[must_use]
pub fn client_struct_type(api: &str) -> String {
    format!("struct {}", client_prefix(api))
}

/// `struct cc_server_<Interface>`
#[must_use]
pub fn server_struct_type(api: &str) -> String {
    format!("struct {}", server_prefix(api))
}

/// `struct cc_server_<Interface>_impl`
#[must_use]
pub fn server_impl_struct_type(api: &str) -> String {
    format!("struct {}_impl", server_prefix(api))
}

/// Prefix of client instance functions: `cc_client_<Interface>`.
#[must_use]
pub fn client_prefix(api: &str) -> String {
    format!("cc_client_{api}")
}

/// Prefix of server instance functions: `cc_server_<Interface>`.
#[must_use]
pub fn server_prefix(api: &str) -> String {
    format!("cc_server_{api}")
}

/// `INCLUDED_CLIENT_<INTERFACE>`
#[must_use]
pub fn client_header_guard(api: &str) -> String {
    format!("INCLUDED_CLIENT_{}", api.to_uppercase())
}

/// `INCLUDED_SERVER_<INTERFACE>`
#[must_use]
pub fn server_header_guard(api: &str) -> String {
    format!("INCLUDED_SERVER_{}", api.to_uppercase())
}

/// Client reply-callback typedef: `cc_<Interface>_<method>_reply_t`.
#[must_use]
pub fn reply_type_name(api: &str, method: &str) -> String {
    format!("{}_reply_t", sync_call_name(api, method))
}

/// Client reply thunk: `cc_<Interface>_<method>_reply_thunk`.
#[must_use]
pub fn reply_thunk_name(api: &str, method: &str) -> String {
    format!("{}_reply_thunk", sync_call_name(api, method))
}

/// Server implementation-callback typedef: `cc_<Interface>_<method>_t`.
#[must_use]
pub fn method_type_name(api: &str, method: &str) -> String {
    format!("{}_t", sync_call_name(api, method))
}

/// Server dispatch thunk: `cc_<Interface>_<method>_thunk`.
#[must_use]
pub fn thunk_name(api: &str, method: &str) -> String {
    format!("{}_thunk", sync_call_name(api, method))
}

/// Synchronous call: `cc_<Interface>_<method>`.
#[must_use]
pub fn sync_call_name(api: &str, method: &str) -> String {
    format!("cc_{api}_{method}")
}

/// Asynchronous call: `cc_<Interface>_<method>_async`.
#[must_use]
pub fn async_call_name(api: &str, method: &str) -> String {
    format!("{}_async", sync_call_name(api, method))
}

/// Output file name: `<side>-<Interface>.<ext>`.
#[must_use]
pub fn file_name(side: &str, api: &str, ext: &str) -> String {
    format!("{side}-{api}.{ext}")
}
