use solana_sdk::{
    instruction::InstructionError, program_utils::limited_deserialize,
    system_instruction::SystemInstruction,
};

use super::InvokeContext;

pub(crate) fn process(ctx: &mut InvokeContext) -> Result<(), InstructionError> {
    let instruction: SystemInstruction = limited_deserialize(ctx.data())?;
    match instruction {
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let from = ctx.signer(0)?;
            let to = ctx.signer(1)?;
            ctx.allocate(&from, &to, lamports, space, &owner)
        }
        SystemInstruction::Transfer { lamports } => {
            let from = ctx.signer(0)?;
            let to = ctx.key(1)?;
            ctx.transfer_lamports(&from, &to, lamports)
        }
        _ => Err(InstructionError::InvalidInstructionData),
    }
}
