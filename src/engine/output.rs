/// Text rendering of what happened, for a console or log. Play does not
/// depend on anything written here.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputBlock {
    Event(String),
    Warning(String),
}

#[derive(Default, Debug)]
pub struct Output {
    pub blocks: Vec<OutputBlock>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Event(s));
        }
    }

    pub fn warn(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Warning(s));
        }
    }

    pub fn take(&mut self) -> Output {
        std::mem::take(self)
    }

    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            OutputBlock::Event(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            OutputBlock::Warning(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
