pub mod dto;
pub mod http_authority;
