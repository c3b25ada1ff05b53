pub mod associated_token;
pub mod fixed_price_sale;
pub mod token_metadata;

use borsh::BorshSerialize;

use crate::error::{Result, StorefrontSdkError};

pub(crate) fn instruction_data<T: BorshSerialize>(discriminator: &[u8], args: &T) -> Result<Vec<u8>> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|_| StorefrontSdkError::SerializationError)?;
    Ok(data)
}

pub(crate) fn check_len(field: &'static str, value: &str, limit: usize) -> Result<()> {
    if value.len() > limit {
        return Err(StorefrontSdkError::StringTooLong {
            field,
            len: value.len(),
            limit,
        });
    }
    Ok(())
}
