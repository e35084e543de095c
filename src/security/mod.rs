mod name;


pub use name::FileNameSanitizer;
