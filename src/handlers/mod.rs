// handlers/mod.rs - route handlers
//
// One file per resource. Every handler does the same thing: read the request,
// make one or two store calls, shape the JSON reply.
pub mod community; // POST /community/:id/upload, GET /getCommunityDetails
pub mod form;      // multipart reading shared by the upload routes
pub mod images;    // POST /upload, GET /image/:id
pub mod root;      // GET /, GET /health
pub mod users;     // POST /register, POST /createAccount

pub use root::{health, root};

#[cfg(test)]
pub(crate) mod test_support;
