use quick_error::quick_error;

quick_error! {
    /// Errors the core refuses to guess about (spec "fatal" taxonomy).
    ///
    /// Decode-unknown and MMIO-unknown conditions are not represented here —
    /// they are logged diagnostics, not propagated errors.
    #[derive(Debug)]
    pub enum CoreError {
        /// a source-chain DMAtag id outside {0,1,2,3,7}
        UnknownDmaTagId(channel: usize, id: u8) {
            display("DMAC channel {}: unrecognized source chain DMAtag id {}", channel, id)
        }
    }
}
