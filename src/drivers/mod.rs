pub mod io4;
