pub mod osv_provider;

pub use osv_provider::OsvSecurityProvider;
