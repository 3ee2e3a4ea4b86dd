use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropsError {
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Element {0} is not a component instance")]
    NotAnInstance(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Failed to render props artifact: {0}")]
    Render(#[from] serde_json::Error),
}
