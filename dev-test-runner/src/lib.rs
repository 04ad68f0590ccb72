//! Codecs generated from `fixtures/` at build time.

pub mod emptytypes {
    include!(concat!(env!("OUT_DIR"), "/emptytypes.rs"));
}

pub mod oneof {
    include!(concat!(env!("OUT_DIR"), "/oneof.rs"));
}

pub mod policies {
    include!(concat!(env!("OUT_DIR"), "/policies.rs"));
}

pub mod compat {
    include!(concat!(env!("OUT_DIR"), "/compat.rs"));
}
