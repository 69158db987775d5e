pub mod compile_time {
    pub mod source {
        /// Maximum decoded source size per file, in bytes (16MB)
        /// SECURITY: Prevents DoS via enormous dictionary files
        pub const MAX_SOURCE_BYTES: usize = 16 * 1024 * 1024;

        /// Maximum number of lines per file
        /// SECURITY: Bounds line-oriented lexers
        pub const MAX_SOURCE_LINES: usize = 1_000_000;
    }

    pub mod inline {
        /// Maximum dialogue length handed to the inline tokenizer, in bytes
        /// Longer dialogues are still tokenized; the excess is logged, not rejected
        pub const LARGE_DIALOGUE_THRESHOLD: usize = 64 * 1024;
    }

    pub mod dialect_a {
        /// Maximum nesting of `{ }` blocks
        /// SECURITY: Prevents stack overflow in the recursive-descent parser
        pub const MAX_BLOCK_DEPTH: usize = 128;

        /// Maximum number of preprocessor defines carried through one batch
        /// RESOURCE: Substitution is linear in the define count per line
        pub const MAX_DEFINES: usize = 4096;
    }

    pub mod dialect_b {
        /// Maximum symbols in the global symbol table of one file
        /// SECURITY: Prevents symbol table explosion
        pub const MAX_SYMBOLS: usize = 100_000;
    }

    pub mod dialect_c {
        /// Maximum aliases on a single entry line
        pub const MAX_ALIASES_PER_ENTRY: usize = 1024;
    }

    pub mod batch {
        /// Maximum number of files accepted in one batch
        /// SECURITY: Rejects pathological requests before any engine runs
        pub const MAX_FILES_PER_BATCH: usize = 50_000;
    }

    pub mod logging {
        /// Buffer size for in-memory log retention
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum collected events per file
        pub const MAX_LOG_EVENTS_PER_FILE: usize = 1000;

        /// Maximum length of a log message before truncation
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;
    }
}
