pub mod api;
pub mod archive;
pub mod compiler;
pub mod deck;
pub mod media;
pub mod package;
pub mod types;

pub use api::AnkiConnectClient;
pub use archive::write_archive;
pub use compiler::{
    CardCompiler,
    CompiledNote,
};
pub use deck::{
    Deck,
    DeckAssembler,
};
pub use media::MediaAsset;
pub use package::write_package;
pub use types::{
    Direction,
    Field,
    NoteModel,
};
