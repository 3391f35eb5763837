use kernel::id::Id;

pub struct SessionTokenMarker;
pub type SessionTokenId = Id<SessionTokenMarker>;
