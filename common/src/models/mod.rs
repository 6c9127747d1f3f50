mod applications;

pub use applications::{Application, Applications, Instance, PortInfo};
