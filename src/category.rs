use std::fmt;

/// The fixed groupings a source tree is split into. Each one is read from
/// the subdirectory of the same name and produces at most one bundle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Client,
    Server,
    Shared,
}

impl Category {
    pub const ALL: [Category; 3] =
        [Category::Client, Category::Server, Category::Shared];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Client => "client",
            Category::Server => "server",
            Category::Shared => "shared",
        }
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.js", self.name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
