pub mod difference;
pub mod frame;
pub mod pixel;
pub mod scorer;
pub mod sensitivity;
