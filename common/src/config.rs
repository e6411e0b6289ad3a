pub struct Config {
    /// Quiet level: 0 prints everything, 1 hides headers, 2 prints only errors.
    pub quiet: u8,
    /// Records the remote commands instead of running them.
    ///
    /// Local side effects (the backup directory) still happen.
    pub dry_run: bool,
}
