/// ライブラリ全体で使用するエラー型。
///
/// どのエラーも実行を即座に中断させます。リトライや部分的な回復は行いません。
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid domain: {0}")]
    Domain(String),

    #[error("invalid size: {0}")]
    Size(String),

    #[error("loss diverged at epoch {epoch}: {loss}")]
    Diverged { epoch: usize, loss: f32 },

    #[error("tensor data error: {0}")]
    Data(String),

    #[error("plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub(crate) fn size(msg: impl Into<String>) -> Self {
        Self::Size(msg.into())
    }
}
