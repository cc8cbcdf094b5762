pub mod asymmetric;
pub mod encode;
pub mod hash;
pub mod mac;
pub mod random;
pub mod symmetric;
