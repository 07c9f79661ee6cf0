pub mod hidraw;
