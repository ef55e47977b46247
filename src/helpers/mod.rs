pub mod http_client;

pub use http_client::{Credentials, HttpClientError, HttpResponse, HttpTransport, ReqwestHttpClient};
