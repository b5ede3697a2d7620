#[macro_use]
extern crate nom;
#[macro_use]
extern crate serde_derive;

pub mod dataflow;
