// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

/// Enum representing the *class* of a CoAP message code.
#[derive(Debug, Copy, Eq, PartialEq, Clone)]
pub enum MsgCodeClass {
    /// Class for methods
    Method = 0,

    /// Class for successful responses
    Success = 2,

    /// Class for client error responses
    ClientError = 4,

    /// Class for server error responses
    ServerError = 5,
}

impl MsgCodeClass {
    /// Tries to calculate the message code class from the given class number.
    pub fn try_from(x: u8) -> Option<MsgCodeClass> {
        match x {
            0 => Some(MsgCodeClass::Method),
            2 => Some(MsgCodeClass::Success),
            4 => Some(MsgCodeClass::ClientError),
            5 => Some(MsgCodeClass::ServerError),
            _ => None,
        }
    }

    /// Returns true if the given message code is in this message code class.
    pub fn contains(self, code: MsgCode) -> bool {
        let code_u8 = code as u8;

        code_u8 != 0 && (code_u8 >> 5) == self as u8
    }
}

/// Helper function
const fn calc_code(class: u8, detail: u8) -> isize {
    (((class & 0x7) << 5) + detail) as isize
}

/// Enum representing the CoAP message codes this crate sends or dispatches on.
#[derive(Debug, Copy, Eq, PartialEq, Clone)]
pub enum MsgCode {
    /// Empty message code. Only used for ping requests, resets, and empty acknowledgements.
    Empty = 0x00,

    /// CoAP GET method.
    MethodGet = 0x01,

    /// CoAP POST method.
    MethodPost = 0x02,

    /// CoAP PUT method.
    MethodPut = 0x03,

    /// CoAP DELETE method.
    MethodDelete = 0x04,

    /// CoAP CREATED success code.
    SuccessCreated = calc_code(2, 1),

    /// CoAP DELETED success code.
    SuccessDeleted = calc_code(2, 2),

    /// CoAP VALID success code.
    SuccessValid = calc_code(2, 3),

    /// CoAP CHANGED success code.
    SuccessChanged = calc_code(2, 4),

    /// CoAP CONTENT success code.
    SuccessContent = calc_code(2, 5),

    /// CoAP BAD_REQUEST client error.
    ClientErrorBadRequest = calc_code(4, 0),

    /// CoAP NOT_FOUND client error.
    ClientErrorNotFound = calc_code(4, 4),

    /// CoAP METHOD_NOT_ALLOWED client error.
    ClientErrorMethodNotAllowed = calc_code(4, 5),

    /// CoAP INTERNAL_SERVER_ERROR server error.
    ServerErrorInternalServerError = calc_code(5, 0),

    /// CoAP NOT_IMPLEMENTED server error.
    ServerErrorNotImplemented = calc_code(5, 1),
}

impl MsgCode {
    /// Tries to convert the given `u8` into a `MsgCode`. If the given code isn't recognized,
    /// this method will return `None`.
    pub fn try_from(x: u8) -> Option<MsgCode> {
        use MsgCode::*;
        match x {
            0x00 => Some(Empty),
            0x01 => Some(MethodGet),
            0x02 => Some(MethodPost),
            0x03 => Some(MethodPut),
            0x04 => Some(MethodDelete),

            0x41 => Some(SuccessCreated),
            0x42 => Some(SuccessDeleted),
            0x43 => Some(SuccessValid),
            0x44 => Some(SuccessChanged),
            0x45 => Some(SuccessContent),

            0x80 => Some(ClientErrorBadRequest),
            0x84 => Some(ClientErrorNotFound),
            0x85 => Some(ClientErrorMethodNotAllowed),

            0xA0 => Some(ServerErrorInternalServerError),
            0xA1 => Some(ServerErrorNotImplemented),

            _ => None,
        }
    }

    /// The class part of the code (the three most significant bits).
    pub fn class(self) -> u8 {
        (self as u8) >> 5
    }

    /// The detail part of the code (the five least significant bits).
    pub fn detail(self) -> u8 {
        (self as u8) & 0b11111
    }

    /// Returns true if this is the empty code.
    pub fn is_empty(self) -> bool {
        self as u8 == 0
    }

    /// Returns true if message code is a method.
    pub fn is_method(self) -> bool {
        MsgCodeClass::Method.contains(self)
    }

    /// Returns true if message code is a client error.
    pub fn is_client_error(self) -> bool {
        MsgCodeClass::ClientError.contains(self)
    }

    /// Returns true if message code is a server error.
    pub fn is_server_error(self) -> bool {
        MsgCodeClass::ServerError.contains(self)
    }

    /// Returns true if message code is any sort of error.
    pub fn is_error(self) -> bool {
        self.is_client_error() || self.is_server_error()
    }

    /// Returns true if message code indicates success.
    pub fn is_success(self) -> bool {
        MsgCodeClass::Success.contains(self)
    }
}

impl Default for MsgCode {
    fn default() -> Self {
        MsgCode::Empty
    }
}

impl core::convert::From<MsgCode> for u8 {
    fn from(code: MsgCode) -> Self {
        code as u8
    }
}

/// Displays a raw code byte in the dotted `class.detail` notation, e.g. `2.05`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DottedCode(pub u8);

impl core::fmt::Display for DottedCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 >> 5, self.0 & 0b11111)
    }
}

impl core::fmt::Display for MsgCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&DottedCode(*self as u8), f)
    }
}
