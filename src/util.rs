/// Elements with a width (eg. number of constant pool slots an entry occupies)
pub trait Width {
    fn width(&self) -> usize;
}
