/// Leading framing byte: whether the record that follows is compressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionFlag {
    None = 0x00,
    Zstd = 0x01,
}

/// Discriminant of the envelope's shortcut union.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ShortcutTag {
    GenericRpc = 0x00,
    WalletSendCalls = 0x01,
    WalletSign = 0x02,
}

/// Discriminant of `wallet_sendCalls` transaction data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionKind {
    Erc20Transfer = 0x00,
    NativeTransfer = 0x01,
    GenericCalls = 0x02,
}

/// Discriminant of `wallet_sign` signature data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureKind {
    SpendPermission = 0x00,
    ReceiveWithAuthorization = 0x01,
    GenericTypedData = 0x02,
}

impl TryFrom<u8> for CompressionFlag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CompressionFlag::None),
            0x01 => Ok(CompressionFlag::Zstd),
            _ => Err(()),
        }
    }
}

impl TryFrom<u8> for ShortcutTag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use ShortcutTag::*;
        let tag = match value {
            0x00 => GenericRpc,
            0x01 => WalletSendCalls,
            0x02 => WalletSign,
            _ => return Err(()),
        };
        Ok(tag)
    }
}

impl TryFrom<u8> for TransactionKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use TransactionKind::*;
        let kind = match value {
            0x00 => Erc20Transfer,
            0x01 => NativeTransfer,
            0x02 => GenericCalls,
            _ => return Err(()),
        };
        Ok(kind)
    }
}

impl TryFrom<u8> for SignatureKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use SignatureKind::*;
        let kind = match value {
            0x00 => SpendPermission,
            0x01 => ReceiveWithAuthorization,
            0x02 => GenericTypedData,
            _ => return Err(()),
        };
        Ok(kind)
    }
}
