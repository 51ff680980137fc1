pub trait HasElementType {
    fn element_type(&self) -> &str;
}
