mod return_url;

pub use return_url::{session_id_from_return_url, session_id_or_return_url};
