pub mod geoip;
pub mod handler;
pub mod merger;
pub mod useragent;
