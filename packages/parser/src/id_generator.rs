/// Sequential id generator for document nodes
///
/// Produces `<prefix><n>` ids. Callers pass a predicate for ids already in
/// use so loaded documents (which may already contain `c7`) never collide.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            count: 0,
        }
    }

    /// Generate the next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}{}", self.prefix, self.count)
    }

    /// Generate the next id that `is_taken` rejects
    pub fn next_free(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id();
            if !is_taken(&id) {
                return id;
            }
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("c")
    }
}
