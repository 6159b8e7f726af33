use crate::error::InternalError;

use scursor::WriteCursor;

pub(crate) trait Serialize {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), InternalError>;
}
