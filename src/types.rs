use serde::Serialize;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Prime,
    Fibonacci,
    Even,
    Random,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Prime,
        Category::Fibonacci,
        Category::Even,
        Category::Random,
    ];

    /// Short code used in `/numbers/{code}`.
    pub fn code(self) -> &'static str {
        match self {
            Category::Prime => "p",
            Category::Fibonacci => "f",
            Category::Even => "e",
            Category::Random => "r",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Prime => "prime",
            Category::Fibonacci => "fibonacci",
            Category::Even => "even",
            Category::Random => "random",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Window snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of the window, oldest first. Owns its data, so later
/// window mutations never show through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WindowSnapshot(Vec<i64>);

impl WindowSnapshot {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Response payload
// ---------------------------------------------------------------------------

/// Body of a successful `GET /numbers/{code}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumbersResponse {
    pub window_prev_state: WindowSnapshot,
    pub window_curr_state: WindowSnapshot,
    pub numbers: Vec<i64>,
    pub avg: f64,
}
