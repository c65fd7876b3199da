pub mod execution_record;
pub mod trade_intent;

pub use execution_record::ExecutionRecord;
pub use trade_intent::TradeIntent;
