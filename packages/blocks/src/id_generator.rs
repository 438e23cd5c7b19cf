use uuid::Uuid;

/// Source of fresh, page-unique identifiers for blocks and list items
pub trait IdSource {
    fn new_id(&mut self) -> String;
}

/// Random v4 UUIDs (used by the live builder)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn new_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Sequential ID generator, deterministic for scripted edits and tests
#[derive(Debug, Clone)]
pub struct SequentialIds {
    seed: String,
    count: u32,
}

impl SequentialIds {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Get seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl IdSource for SequentialIds {
    fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn new_id(&mut self) -> String {
        (**self).new_id()
    }
}

impl<T: IdSource + ?Sized> IdSource for Box<T> {
    fn new_id(&mut self) -> String {
        (**self).new_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut gen = SequentialIds::new("blk");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert_eq!(id1, "blk-1");
        assert_eq!(id2, "blk-2");
        assert_eq!(id3, "blk-3");
        assert_eq!(gen.seed(), "blk");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut gen = UuidIds;
        let a = gen.new_id();
        let b = gen.new_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
